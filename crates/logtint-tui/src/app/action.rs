use logtint_types::Severity;

/// All possible actions in the viewer (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // UI toggles
    ToggleHelp,
    ToggleStats,
    ToggleAutoScroll,

    // Scrolling
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,

    // Visibility (applied by the host to the shared settings)
    ToggleSeverity(Severity),
    ToggleUnclassified,
    ShowAllSeverities,

    // Multiple sources (applied by the host)
    NextSource,

    // Error handling
    ShowError(String),
    DismissError,
}
