// Operator loop: line console or keyboard jog
// All arm access goes through MotorController; this module only turns
// operator input into controller calls and prints the results.

use std::ops::ControlFlow;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::{ArmConfig, JOG_STEP};
use crate::console::{self, Command};
use crate::controller::{CommitOutcome, Delivery, MotorController};
use crate::error::Result as ArmResult;
use crate::motor::{ARM_MOTOR_IDS, FrameSink};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn report(delivery: Delivery) {
    if let Delivery::Dropped(e) = delivery {
        println!("(not sent: {})", e);
    }
}

fn print_status<T: FrameSink>(ctl: &MotorController<T>) {
    let link = if ctl.is_connected() { "connected" } else { "offline" };
    println!("link: {}", link);
    for motor in ctl.motors() {
        println!(
            "  {} {:<12} {:>5} {}",
            motor.id(),
            motor.name(),
            motor.position(),
            if motor.status() { "enabled" } else { "" }
        );
    }
}

/// Apply one operator command
pub fn execute<T: FrameSink>(ctl: &mut MotorController<T>, cmd: Command) -> ArmResult<ControlFlow<()>> {
    match cmd {
        Command::Set { motor, value } => report(ctl.set_motor_position(motor, value)?),
        Command::Get { motor } => {
            println!("{} {}", ctl.motor_name(motor)?, ctl.motor_position(motor)?)
        }
        Command::Rename { motor, name } => ctl.set_motor_name(motor, name)?,
        Command::Status => print_status(ctl),
        Command::New => ctl.start_new_sequence(),
        Command::AddMove(positions) => {
            let positions = if positions.is_empty() {
                ctl.current_positions()
            } else {
                positions
            };
            let recorded = ctl.add_move_to_current_sequence(&positions)?;
            println!("move {} recorded", recorded.count);
            if !recorded.report.all_sent() {
                println!("({} frames not sent)", recorded.report.dropped);
            }
        }
        Command::Title(name) => ctl.set_sequence_name(name)?,
        Command::Commit(name) => {
            let name = match name {
                Some(name) => name,
                None => ctl
                    .current_sequence()
                    .map(|s| s.name().to_string())
                    .unwrap_or_default(),
            };
            match ctl.commit_sequence(name)? {
                CommitOutcome::Committed { index } => println!("saved as sequence {}", index),
                CommitOutcome::NameRequired => println!("give the sequence a name first"),
            }
        }
        Command::Discard => {
            ctl.discard_sequence()?;
        }
        Command::List => {
            for (i, seq) in ctl.list_sequences().iter().enumerate() {
                println!("{}: {} ({} moves)", i, seq.name(), seq.move_count());
            }
        }
        Command::Delete(index) => {
            ctl.delete_sequence(index)?;
        }
        Command::Show { sequence, index } => ctl.preview_move(sequence, index)?,
        Command::Play(index) => {
            let played = ctl.play_sequence(index)?;
            println!("{} frames sent, {} dropped", played.sent, played.dropped);
        }
        Command::Calibrate => ctl.calibrate_vertical_axis(),
        Command::Help => println!("{}", console::HELP),
        Command::Quit => return Ok(ControlFlow::Break(())),
    }
    Ok(ControlFlow::Continue(()))
}

/// Read commands from stdin until `quit` or end of input
pub async fn run_console<T: FrameSink>(ctl: &mut MotorController<T>) -> Result<(), BoxError> {
    info!("Console ready, type 'help' for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let cmd = match console::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match execute(ctl, cmd) {
            Ok(ControlFlow::Break(())) => break,
            Ok(ControlFlow::Continue(())) => {}
            Err(e) => println!("error: {}", e),
        }
    }
    Ok(())
}

/// Keyboard jog: 1-6 select motor, Left/Right move, Up/Down step size, Q quit
pub async fn run_jog<T: FrameSink>(ctl: &mut MotorController<T>) -> Result<(), BoxError> {
    info!("Jog mode: 1-6 select motor, Left/Right move, Up/Down step, Q quit");

    enable_raw_mode()?;
    let result = jog_loop(ctl);
    disable_raw_mode()?;

    result
}

fn jog_loop<T: FrameSink>(ctl: &mut MotorController<T>) -> Result<(), BoxError> {
    let mut selected = ARM_MOTOR_IDS[0];
    let mut step = JOG_STEP;

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        let delta = match code {
            KeyCode::Char(c @ '1'..='6') => {
                let slot = c as usize - '1' as usize;
                selected = ARM_MOTOR_IDS[slot];
                info!("Selected {}", selected);
                continue;
            }
            KeyCode::Up => {
                step = (step * 2).min(4096);
                info!("Step: {}", step);
                continue;
            }
            KeyCode::Down => {
                step = (step / 2).max(1);
                info!("Step: {}", step);
                continue;
            }
            KeyCode::Char('c') => {
                ctl.calibrate_vertical_axis();
                continue;
            }
            KeyCode::Left => -step,
            KeyCode::Right => step,
            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => continue,
        };

        let target = (ctl.motor_position(selected)? as i64 + delta).clamp(0, u16::MAX as i64);
        if let Delivery::Dropped(e) = ctl.set_motor_position(selected, target)? {
            warn!("{} -> {} not sent: {}", selected, target, e);
        }
    }

    Ok(())
}

pub async fn run(config: ArmConfig, jog: bool) -> Result<(), BoxError> {
    info!("Opening serial link on {}...", config.port);
    let mut ctl = MotorController::from_config(&config)?;
    if !ctl.is_connected() {
        warn!("Running without hardware, positions are tracked locally only");
    }

    if jog {
        run_jog(&mut ctl).await
    } else {
        run_console(&mut ctl).await
    }
}
