//! Hydration gate.
//!
//! Derived values must not be read from the empty default snapshot before the
//! persisted one is loaded. The gate records whether that load has happened.

/// Whether persisted state has been loaded into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HydrationState {
    /// Not loaded yet
    #[default]
    Cold,
    /// Load attempted, successfully or not
    Hydrated,
}

/// One-shot Cold -> Hydrated latch.
#[derive(Debug, Clone, Default)]
pub struct HydrationGate {
    state: HydrationState,
}

impl HydrationGate {
    /// A cold gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> HydrationState {
        self.state
    }

    /// Whether the gate has fired.
    pub fn is_hydrated(&self) -> bool {
        self.state == HydrationState::Hydrated
    }

    /// Fire the gate. Returns `false` if it had already fired.
    pub fn open(&mut self) -> bool {
        if self.is_hydrated() {
            return false;
        }
        self.state = HydrationState::Hydrated;
        true
    }

    /// Pick `cold` while the gate is closed, otherwise compute the real value.
    pub fn select<T>(&self, cold: T, hydrated: impl FnOnce() -> T) -> T {
        match self.state {
            HydrationState::Cold => cold,
            HydrationState::Hydrated => hydrated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_fires_once() {
        let mut gate = HydrationGate::new();
        assert_eq!(gate.state(), HydrationState::Cold);

        assert!(gate.open());
        assert!(gate.is_hydrated());
        assert!(!gate.open());
        assert_eq!(gate.state(), HydrationState::Hydrated);
    }

    #[test]
    fn test_select() {
        let mut gate = HydrationGate::new();
        assert_eq!(gate.select(0, || 42), 0);
        gate.open();
        assert_eq!(gate.select(0, || 42), 42);
    }
}
