use tracing::debug;

use crate::auto_event::{AutoEventList, FrequencyUnit};
use crate::models::{AdminState, AutoEvent, OperatingState, ProfileRef, ServiceRef};
use crate::protocol::{ProtocolConfig, ProtocolMode};

/// Wizard pages in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SelectService,
    SelectProfile,
    DeviceInfo,
    AutoEvents,
    Protocols,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::SelectService,
        Step::SelectProfile,
        Step::DeviceInfo,
        Step::AutoEvents,
        Step::Protocols,
    ];

    pub const LAST: Step = Step::Protocols;

    pub fn index(self) -> i32 {
        match self {
            Step::SelectService => 0,
            Step::SelectProfile => 1,
            Step::DeviceInfo => 2,
            Step::AutoEvents => 3,
            Step::Protocols => 4,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.index() == index)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::SelectService => "Device Service",
            Step::SelectProfile => "Device Profile",
            Step::DeviceInfo => "Device Info",
            Step::AutoEvents => "Auto Events",
            Step::Protocols => "Protocols",
        }
    }
}

/// Plain device attributes entered on the device-info page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceFields {
    pub name: String,
    pub description: String,
    pub labels: Option<String>,
    pub admin_state: AdminState,
    pub operating_state: OperatingState,
}

/// Everything the operator can do to the wizard
#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    SelectService(ServiceRef),
    SelectProfile(ProfileRef),

    SetName(String),
    SetDescription(String),
    SetLabels(String),
    SetAdminState(AdminState),
    SetOperatingState(OperatingState),

    Advance,
    Retreat,
    SkipCurrentStep,

    SwitchProtocolMode(ProtocolMode),
    SelectTemplate(String),
    SetProtocolName(String),
    SetTemplateField { field: String, value: String },
    AddCustomProperty,
    RemoveCustomProperty(u64),
    SetCustomKey { id: u64, key: String },
    SetCustomValue { id: u64, value: String },
    ResetCustomProperties,

    LoadAutoEvents(Vec<AutoEvent>),
    AddAutoEvent,
    RemoveAutoEvent(u64),
    SetAutoEventFrequency { id: u64, value: String },
    SetAutoEventUnit { id: u64, unit: FrequencyUnit },
    SetAutoEventOnChange { id: u64, on_change: bool },
    SetAutoEventResource { id: u64, resource: String },
}

/// Complete state of one add-device wizard
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    current_step: i32,
    selected_service: Option<ServiceRef>,
    selected_profile: Option<ProfileRef>,
    pub(crate) device: DeviceFields,
    pub(crate) protocol: ProtocolConfig,
    pub(crate) auto_events: AutoEventList,
    pub(crate) submitting: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: 0,
            selected_service: None,
            selected_profile: None,
            device: DeviceFields::default(),
            protocol: ProtocolConfig::new(),
            auto_events: AutoEventList::with_blank(),
            submitting: false,
        }
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> i32 {
        self.current_step
    }

    pub fn step(&self) -> Option<Step> {
        Step::from_index(self.current_step)
    }

    pub fn selected_service(&self) -> Option<&ServiceRef> {
        self.selected_service.as_ref()
    }

    pub fn selected_profile(&self) -> Option<&ProfileRef> {
        self.selected_profile.as_ref()
    }

    pub fn device(&self) -> &DeviceFields {
        &self.device
    }

    pub fn protocol(&self) -> &ProtocolConfig {
        &self.protocol
    }

    pub fn auto_events(&self) -> &AutoEventList {
        &self.auto_events
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Next page. Does not consult `can_advance` and has no upper bound.
    pub fn advance(&mut self) {
        self.current_step += 1;
    }

    /// Previous page, no lower bound
    pub fn retreat(&mut self) {
        self.current_step -= 1;
    }

    /// Leave the auto-event page with no auto events configured
    pub fn skip_current_step(&mut self) {
        self.auto_events.clear();
        self.advance();
    }

    /// Whether the "next" control is enabled on `step`
    pub fn can_advance(&self, step: i32) -> bool {
        match Step::from_index(step) {
            Some(Step::SelectService) => self.selected_service.is_some(),
            Some(Step::SelectProfile) => self.selected_profile.is_some(),
            Some(Step::DeviceInfo) => !self.device.name.is_empty(),
            Some(Step::AutoEvents) => self.auto_events.all_ready(),
            Some(Step::Protocols) | None => true,
        }
    }

    pub fn can_advance_current(&self) -> bool {
        self.can_advance(self.current_step)
    }

    /// Apply one operator action.
    pub fn update(&mut self, action: WizardAction) {
        debug!("Wizard step {} applying {:?}", self.current_step, action);

        match action {
            WizardAction::SelectService(service) => self.selected_service = Some(service),
            WizardAction::SelectProfile(profile) => self.selected_profile = Some(profile),

            WizardAction::SetName(name) => self.device.name = name,
            WizardAction::SetDescription(description) => self.device.description = description,
            WizardAction::SetLabels(labels) => {
                self.device.labels = if labels.is_empty() { None } else { Some(labels) };
            }
            WizardAction::SetAdminState(state) => self.device.admin_state = state,
            WizardAction::SetOperatingState(state) => self.device.operating_state = state,

            WizardAction::Advance => self.advance(),
            WizardAction::Retreat => self.retreat(),
            WizardAction::SkipCurrentStep => self.skip_current_step(),

            WizardAction::SwitchProtocolMode(mode) => self.protocol.switch_model(mode),
            WizardAction::SelectTemplate(kind) => self.protocol.select_template(&kind),
            WizardAction::SetProtocolName(name) => self.protocol.set_name(name),
            WizardAction::SetTemplateField { field, value } => {
                self.protocol.set_template_field(&field, value);
            }
            WizardAction::AddCustomProperty => {
                self.protocol.add_custom_property();
            }
            WizardAction::RemoveCustomProperty(id) => {
                self.protocol.remove_custom_property(id);
            }
            WizardAction::SetCustomKey { id, key } => self.protocol.set_custom_key(id, key),
            WizardAction::SetCustomValue { id, value } => self.protocol.set_custom_value(id, value),
            WizardAction::ResetCustomProperties => self.protocol.reset_custom_properties(),

            WizardAction::LoadAutoEvents(events) => self.auto_events.load_from_existing(&events),
            WizardAction::AddAutoEvent => {
                self.auto_events.append_blank();
            }
            WizardAction::RemoveAutoEvent(id) => {
                self.auto_events.remove(id);
            }
            WizardAction::SetAutoEventFrequency { id, value } => {
                if let Some(entry) = self.auto_events.entry_mut(id) {
                    entry.frequency_value = value;
                }
            }
            WizardAction::SetAutoEventUnit { id, unit } => {
                if let Some(entry) = self.auto_events.entry_mut(id) {
                    entry.unit = unit;
                }
            }
            WizardAction::SetAutoEventOnChange { id, on_change } => {
                if let Some(entry) = self.auto_events.entry_mut(id) {
                    entry.on_change = on_change;
                }
            }
            WizardAction::SetAutoEventResource { id, resource } => {
                if let Some(entry) = self.auto_events.entry_mut(id) {
                    entry.resource_name = resource;
                }
            }
        }
    }

    /// Reducer form of `update` for callers holding the state by value
    pub fn reduce(mut self, action: WizardAction) -> Self {
        self.update(action);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_event_id(state: &WizardState) -> u64 {
        state.auto_events().entries()[0].id
    }

    #[test]
    fn test_initial_state() {
        let state = WizardState::new();

        assert_eq!(state.current_step(), 0);
        assert_eq!(state.step(), Some(Step::SelectService));
        assert_eq!(state.auto_events().len(), 1);
        assert_eq!(state.protocol().custom_properties().len(), 1);
        assert_eq!(state.device().admin_state, AdminState::Unlocked);
        assert_eq!(state.device().operating_state, OperatingState::Up);
        assert!(!state.is_submitting());
    }

    #[test]
    fn test_service_and_profile_gates() {
        let mut state = WizardState::new();
        assert!(!state.can_advance(0));
        assert!(!state.can_advance(1));

        state.update(WizardAction::SelectService(ServiceRef::named("svc-1")));
        assert!(state.can_advance(0));
        assert!(!state.can_advance(1));

        state.update(WizardAction::SelectProfile(ProfileRef::named("profile-1")));
        assert!(state.can_advance(1));
    }

    #[test]
    fn test_device_name_gate() {
        let mut state = WizardState::new();
        assert!(!state.can_advance(2));

        state.update(WizardAction::SetName("dev-A".to_string()));
        assert!(state.can_advance(2));

        state.update(WizardAction::SetName(String::new()));
        assert!(!state.can_advance(2));
    }

    #[test]
    fn test_auto_event_gate() {
        let mut state = WizardState::new();
        let id = first_event_id(&state);
        assert!(!state.can_advance(3));

        state.update(WizardAction::SetAutoEventResource { id, resource: "temp".to_string() });
        assert!(!state.can_advance(3));

        state.update(WizardAction::SetAutoEventFrequency { id, value: "5.5".to_string() });
        assert!(!state.can_advance(3));

        state.update(WizardAction::SetAutoEventFrequency { id, value: "5".to_string() });
        assert!(state.can_advance(3));

        // one bad row blocks the whole step
        state.update(WizardAction::AddAutoEvent);
        assert!(!state.can_advance(3));
    }

    #[test]
    fn test_empty_auto_event_list_passes_gate() {
        let mut state = WizardState::new();
        state.update(WizardAction::RemoveAutoEvent(first_event_id(&state)));

        assert!(state.auto_events().is_empty());
        assert!(state.can_advance(3));
    }

    #[test]
    fn test_final_and_unknown_steps_are_open() {
        let state = WizardState::new();
        assert!(state.can_advance(4));
        assert!(state.can_advance(5));
        assert!(state.can_advance(-1));
    }

    #[test]
    fn test_advance_and_retreat_are_unclamped() {
        let mut state = WizardState::new();
        state.update(WizardAction::Retreat);
        assert_eq!(state.current_step(), -1);
        assert_eq!(state.step(), None);

        for _ in 0..7 {
            state.update(WizardAction::Advance);
        }
        assert_eq!(state.current_step(), 6);
        assert_eq!(state.step(), None);
    }

    #[test]
    fn test_advance_ignores_gate() {
        let state = WizardState::new().reduce(WizardAction::Advance);

        assert!(!state.can_advance(0));
        assert_eq!(state.step(), Some(Step::SelectProfile));
    }

    #[test]
    fn test_skip_clears_auto_events_and_advances() {
        let mut state = WizardState::new();
        state.update(WizardAction::AddAutoEvent);
        for _ in 0..3 {
            state.update(WizardAction::Advance);
        }

        state.update(WizardAction::SkipCurrentStep);

        assert!(state.auto_events().is_empty());
        assert_eq!(state.step(), Some(Step::Protocols));
    }

    #[test]
    fn test_labels_cleared_to_none() {
        let mut state = WizardState::new();
        state.update(WizardAction::SetLabels("a,b".to_string()));
        assert_eq!(state.device().labels.as_deref(), Some("a,b"));

        state.update(WizardAction::SetLabels(String::new()));
        assert_eq!(state.device().labels, None);
    }

    #[test]
    fn test_edits_to_unknown_rows_are_ignored() {
        let mut state = WizardState::new();
        let before = state.clone();

        state.update(WizardAction::SetAutoEventResource { id: 42, resource: "x".to_string() });
        state.update(WizardAction::SetCustomKey { id: 42, key: "x".to_string() });
        state.update(WizardAction::RemoveCustomProperty(42));
        state.update(WizardAction::RemoveAutoEvent(42));

        assert_eq!(state, before);
    }

    #[test]
    fn test_step_indices() {
        for step in Step::ALL {
            assert_eq!(Step::from_index(step.index()), Some(step));
        }
        assert_eq!(Step::LAST.index(), 4);
    }
}
