use std::{
    fs,
    io::{self, ErrorKind, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::*;
use ls8_cpu::{CpuError, ImageError, Machine, OutputPort, ProgramImage, RunLimits};

mod config;
use config::Config;

/// Why we stopped, as far as the shell is concerned.
const EXIT_OK: u8 = 0;
const EXIT_BAD_INPUT: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;
const EXIT_EMPTY: u8 = 3;
const EXIT_MACHINE_FAULT: u8 = 4;

/// PRN prints one decimal number per line. The CPU can't be told that a
/// write failed, so the first failure is kept for `run` to report and later
/// values are dropped.
struct LineOutput<W: Write> {
    writer: W,
    write_error: Option<io::Error>,
}

impl<W: Write> LineOutput<W> {
    fn new(writer: W) -> Self {
        LineOutput {
            writer,
            write_error: None,
        }
    }
}

impl<W: Write> OutputPort for LineOutput<W> {
    fn emit(&mut self, value: u8) {
        if self.write_error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{value}") {
            self.write_error = Some(err);
        }
    }
}

fn run(config: &Config) -> Result<()> {
    let path = config.program_path.display();
    info!("Attempting to open path: '{path}'");
    let source = fs::read_to_string(&config.program_path)
        .with_context(|| format!("Couldn't open {path}"))?;
    let image = ProgramImage::parse(&source)?;
    info!(
        "Program is {} bytes, starting at {:02X}",
        image.bytes().len(),
        image.entry()
    );
    let mut machine = Machine::new(LineOutput::new(io::stdout().lock()));
    machine.load(&image)?;
    let limits = RunLimits {
        max_steps: config.max_steps,
        ..RunLimits::default()
    };
    let result = machine.run_with(&limits);
    debug!("CPU: {:?}", machine.cpu());
    if let Err(err) = &result {
        if err.is_fault() {
            error!("The program crashed: {}", machine.trace());
        } else {
            warn!("Stopped before the program halted: {}", machine.trace());
        }
    }
    if let Some(err) = &machine.output().write_error {
        warn!("Some PRN output was lost: {err}");
    }
    let executed = result?;
    info!("Halted after {executed} instructions");
    Ok(())
}

fn exit_status(err: &anyhow::Error) -> u8 {
    if let Some(err) = err.downcast_ref::<ImageError>() {
        return match err {
            ImageError::Empty => EXIT_EMPTY,
            ImageError::InvalidNumber { .. } | ImageError::TooLarge { .. } => EXIT_BAD_INPUT,
        };
    }
    if let Some(err) = err.downcast_ref::<io::Error>() {
        return match err.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => EXIT_NOT_FOUND,
            _ => EXIT_BAD_INPUT,
        };
    }
    if err.downcast_ref::<CpuError>().is_some() {
        return EXIT_MACHINE_FAULT;
    }
    EXIT_BAD_INPUT
}

/// `--help` isn't a mistake; anything else clap complains about is a usage
/// error.
fn usage_exit_status(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        EXIT_BAD_INPUT
    } else {
        EXIT_OK
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let config = match Config::try_parse_from(std::env::args()) {
        Ok(config) => config,
        Err(err) => {
            // Nowhere left to report a failure to print the usage text.
            let _ = err.print();
            return ExitCode::from(usage_exit_status(&err));
        }
    };
    match run(&config) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_failures_keep_their_exit_codes() {
        let empty = anyhow::Error::from(ImageError::Empty);
        assert_eq!(exit_status(&empty), EXIT_EMPTY);

        let invalid = anyhow::Error::from(ImageError::InvalidNumber {
            line: 3,
            text: "2".to_string(),
        });
        assert_eq!(exit_status(&invalid), EXIT_BAD_INPUT);

        let missing = fs::read_to_string("/definitely/not/a/program.ls8")
            .context("Couldn't open it")
            .unwrap_err();
        assert_eq!(exit_status(&missing), EXIT_NOT_FOUND);
    }

    #[test]
    fn machine_faults_have_their_own_exit_code() {
        let fault = anyhow::Error::from(CpuError::IllegalOpcode {
            address: 3,
            opcode: 0,
        });
        assert_eq!(exit_status(&fault), EXIT_MACHINE_FAULT);
        let limit = anyhow::Error::from(CpuError::StepLimitReached { limit: 10 });
        assert_eq!(exit_status(&limit), EXIT_MACHINE_FAULT);
    }

    #[test]
    fn usage_errors_exit_with_one() {
        let err = Config::try_parse_from(["ls8"]).unwrap_err();
        assert_eq!(usage_exit_status(&err), EXIT_BAD_INPUT);
        let err = Config::try_parse_from(["ls8", "a.ls8", "--max-steps", "x"]).unwrap_err();
        assert_eq!(usage_exit_status(&err), EXIT_BAD_INPUT);
        let err = Config::try_parse_from(["ls8", "--help"]).unwrap_err();
        assert_eq!(usage_exit_status(&err), EXIT_OK);
    }

    #[test]
    fn prints_one_value_per_line() {
        let mut output = LineOutput::new(Vec::new());
        output.emit(17);
        output.emit(255);
        assert!(output.write_error.is_none());
        assert_eq!(output.writer, b"17\n255\n");
    }

    struct BrokenPipe {
        attempts: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::Error::from(ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn first_write_failure_is_kept_and_the_rest_dropped() {
        let mut output = LineOutput::new(BrokenPipe { attempts: 0 });
        output.emit(1);
        output.emit(2);
        output.emit(3);
        let attempts = output.writer.attempts;
        assert_eq!(
            output.write_error.map(|err| err.kind()),
            Some(ErrorKind::BrokenPipe)
        );
        assert_eq!(attempts, 1);
    }
}
