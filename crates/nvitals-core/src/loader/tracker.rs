/// Generation number handed to one loader invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Guards displayed state against superseded loads.
///
/// Every new load takes a ticket from `begin`. Loads are never cancelled;
/// when one finishes, its result is applied only if its ticket is still the
/// latest one issued, so a slow load for a previous county cannot overwrite a
/// newer one.
#[derive(Debug, Default)]
pub struct LoadTracker {
    latest: u64,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Invalidate all outstanding tickets (e.g. when the view closes).
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}
