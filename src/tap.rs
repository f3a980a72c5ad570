use std::io::{self, Write};

/// Minimal TAP producer: a version line, a plan, then numbered results.
pub struct TapWriter<W: Write> {
    out: W,
    next: usize,
}

impl<W: Write> TapWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, next: 1 }
    }

    pub fn plan_ahead(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "TAP version 14")?;
        writeln!(self.out, "1..{count}")
    }

    pub fn ok(&mut self, description: &str) -> io::Result<()> {
        writeln!(self.out, "ok {} - {description}", self.next)?;
        self.next += 1;
        Ok(())
    }
}
