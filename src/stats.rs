use std::io;
use std::time::{Duration, Instant};

use console::{style, Term};

use crate::types::OpKind;

/// Lifetime tallies. Only the driver writes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub reads: u64,
    pub writes: u64,
    /// Operations that were attempted but did not complete
    pub failed: u64,
    /// Cycles that picked a dead instance
    pub skipped: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: OpKind) {
        match kind {
            OpKind::Write => self.writes += 1,
            OpKind::Read => self.reads += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn completed(&self) -> u64 {
        self.reads + self.writes
    }
}

/// Lets an action through at most once per interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Single self-overwriting status line: `[ ↑ writes | ↓ reads ]`.
pub struct StatusLine {
    term: Term,
    draws: u64,
}

impl StatusLine {
    pub fn new(term: Term) -> Self {
        Self { term, draws: 0 }
    }

    pub fn stdout() -> Self {
        Self::new(Term::stdout())
    }

    pub fn draw(&mut self, counters: &Counters) -> io::Result<()> {
        self.draws += 1;
        self.term.clear_line()?;
        self.term.write_str(&render(counters))?;
        self.term.flush()
    }

    /// Leave the last drawn line in place.
    pub fn finish(&mut self, counters: &Counters) -> io::Result<()> {
        self.draw(counters)?;
        self.term.write_line("")?;
        self.term.flush()
    }

    /// How many times the line was drawn.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

pub fn render(counters: &Counters) -> String {
    let mut line = format!(
        "{} {} {} {} {}",
        style("[").dim(),
        style(format!("↑ {}", pretty_num(counters.writes))).cyan(),
        style("|").dim(),
        style(format!("↓ {}", pretty_num(counters.reads))).magenta(),
        style("]").dim(),
    );
    if counters.failed > 0 {
        line.push_str(&format!(" {}", style(format!("✗ {}", pretty_num(counters.failed))).red()));
    }
    line
}

/// Decimal digits grouped by three with ASCII commas, no locale handling:
/// `1234567` -> `1,234,567`
pub fn pretty_num(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
