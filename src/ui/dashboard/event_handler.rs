/// Events that can occur in the dashboard TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    /// Quit the application
    Quit,
    /// Toggle help overlay
    ToggleHelp,
    /// Select next host
    NextHost,
    /// Select previous host
    PrevHost,
    /// Navigate container list up
    ContainerUp,
    /// Navigate container list down
    ContainerDown,
    /// Cycle the detail chart metric (cpu -> mem -> net)
    CycleMetric,
    /// Toggle enhanced axes on the detail chart
    ToggleEnhanced,
    /// Pointer moved to (column, row)
    PointerMoved(u16, u16),
    /// No action
    None,
}
