/// Where PRN sends its values. The CPU doesn't own standard output; whoever
/// runs it decides what "printing" means.
pub trait OutputPort {
    fn emit(&mut self, value: u8);
}

/// Collect everything printed, handy for tests.
impl OutputPort for Vec<u8> {
    fn emit(&mut self, value: u8) {
        self.push(value);
    }
}

impl<O: OutputPort + ?Sized> OutputPort for &mut O {
    fn emit(&mut self, value: u8) {
        (**self).emit(value)
    }
}

/// Throw everything away.
pub struct NullOutput;

impl OutputPort for NullOutput {
    fn emit(&mut self, _value: u8) {}
}
