use std::process::ExitCode;

use log::*;
use ls8_cpu::{Cpu, CpuError, Memory, ProgramImage, Result, MEMORY_SIZE};

/// (name, source, what it should print)
const PROGRAMS: &[(&str, &str, &[u8])] = &[
    ("print8", include_str!("../programs/print8.ls8"), &[8]),
    ("mult", include_str!("../programs/mult.ls8"), &[72]),
    ("stack", include_str!("../programs/stack.ls8"), &[2, 4, 1]),
    ("call", include_str!("../programs/call.ls8"), &[20, 30, 36, 60]),
    ("arith", include_str!("../programs/arith.ls8"), &[3, 4]),
];

/// None of these should take anywhere near this long.
const MAX_STEPS: u64 = 10_000;

struct RAMputer {
    ram: [u8; MEMORY_SIZE],
}

impl RAMputer {
    fn new(image: &ProgramImage) -> RAMputer {
        let mut ram = [0u8; MEMORY_SIZE];
        ram[..image.bytes().len()].copy_from_slice(image.bytes());
        RAMputer { ram }
    }
}

impl Memory for RAMputer {
    fn read_byte(&mut self, address: u16) -> Result<u8> {
        let data = *self
            .ram
            .get(address as usize)
            .ok_or(CpuError::OutOfBounds { address })?;
        trace!("Read: {address:02X} --> {data:02X}");
        Ok(data)
    }
    fn write_byte(&mut self, address: u16, data: u8) -> Result<()> {
        trace!("Write: {address:02X} <-- {data:02X}");
        let cell = self
            .ram
            .get_mut(address as usize)
            .ok_or(CpuError::OutOfBounds { address })?;
        *cell = data;
        Ok(())
    }
}

/// Run one program to completion and hand back what it printed.
fn run_program(source: &str) -> std::result::Result<Vec<u8>, String> {
    let image = ProgramImage::parse(source).map_err(|err| err.to_string())?;
    let mut ramputer = RAMputer::new(&image);
    let mut cpu = Cpu::new();
    cpu.reset(image.entry());
    let mut printed = Vec::new();
    while cpu.is_running() {
        if cpu.steps() >= MAX_STEPS {
            return Err(format!("still running after {MAX_STEPS} instructions"));
        }
        debug!("{cpu:?}");
        cpu.step(&mut ramputer, &mut printed)
            .map_err(|err| err.to_string())?;
    }
    Ok(printed)
}

fn main() -> ExitCode {
    env_logger::init();
    let mut failures = 0;
    for (name, source, expected) in PROGRAMS {
        match run_program(source) {
            Ok(printed) if printed == *expected => println!("{name}: ok {printed:?}"),
            Ok(printed) => {
                println!("{name}: FAILED, printed {printed:?} but expected {expected:?}");
                failures += 1;
            }
            Err(err) => {
                println!("{name}: FAILED, {err}");
                failures += 1;
            }
        }
    }
    if failures == 0 {
        println!("All {} programs behaved. Tell me I did good!", PROGRAMS.len());
        ExitCode::SUCCESS
    } else {
        println!("{failures} of {} programs misbehaved.", PROGRAMS.len());
        ExitCode::FAILURE
    }
}
