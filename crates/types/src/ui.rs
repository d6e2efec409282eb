use std::fmt;

/// Shown on a control when no wallet provider is configured.
pub const PROVIDER_PROMPT: &str = "Please configure a wallet provider";
pub const CONNECTED_LABEL: &str = "Connected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Connect,
    Fund,
    Withdraw,
    Balance,
    Time,
}

impl Control {
    pub const ALL: [Self; 5] = [
        Self::Connect,
        Self::Fund,
        Self::Withdraw,
        Self::Balance,
        Self::Time,
    ];

    #[must_use]
    pub const fn default_label(self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::Fund => "Fund",
            Self::Withdraw => "Withdraw",
            Self::Balance => "Get Balance",
            Self::Time => "Time Remaining",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Connect => 0,
            Self::Fund => 1,
            Self::Withdraw => 2,
            Self::Balance => 3,
            Self::Time => 4,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_label())
    }
}

/// What the user sees: control labels, whether withdrawing is offered, and
/// the outcome of the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    labels: [String; 5],
    withdraw_enabled: bool,
    reload_requested: bool,
    status: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            labels: Control::ALL.map(|c| c.default_label().to_string()),
            withdraw_enabled: true,
            reload_requested: false,
            status: None,
        }
    }

    #[must_use]
    pub fn label(&self, control: Control) -> &str {
        &self.labels[control.index()]
    }

    pub fn set_label(&mut self, control: Control, label: impl Into<String>) {
        self.labels[control.index()] = label.into();
    }

    /// Labels that no longer show their default text.
    pub fn changed_labels(&self) -> impl Iterator<Item = (Control, &str)> {
        Control::ALL
            .into_iter()
            .map(|c| (c, self.label(c)))
            .filter(|(c, label)| *label != c.default_label())
    }

    pub fn reset_labels(&mut self) {
        self.labels = Control::ALL.map(|c| c.default_label().to_string());
    }

    #[must_use]
    pub const fn withdraw_enabled(&self) -> bool {
        self.withdraw_enabled
    }

    pub const fn set_withdraw_enabled(&mut self, enabled: bool) {
        self.withdraw_enabled = enabled;
    }

    #[must_use]
    pub const fn reload_requested(&self) -> bool {
        self.reload_requested
    }

    pub const fn request_reload(&mut self) {
        self.reload_requested = true;
    }

    pub const fn take_reload_request(&mut self) -> bool {
        let requested = self.reload_requested;
        self.reload_requested = false;
        requested
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}
