//! State and payload assembly for the console's add-device wizard.
//!
//! The wizard walks the operator through five pages (device service,
//! device profile, device info, auto events, protocols). All state lives in
//! [`WizardState`] and changes only through [`WizardState::update`], so the
//! same logic drives the browser UI and the tests. Submission goes through
//! the [`DeviceCreator`], [`Notifier`] and [`Navigator`] seams.

pub mod auto_event;
pub mod error;
pub mod models;
pub mod protocol;
pub mod state;
pub mod submission;

pub use auto_event::{AutoEventEntry, AutoEventList, FrequencyUnit, is_integer_frequency, split_frequency};
pub use error::{Result, WizardError};
pub use models::{
    AddDeviceRequest, AdminState, AutoEvent, BaseResponse, Device, DeviceResponse, ExistingDevice,
    MultiDeviceProfilesResponse, MultiDeviceServicesResponse, OperatingState, ProfileRef, ProtocolProperties,
    ServiceRef,
};
pub use protocol::{CustomProperty, ProtocolConfig, ProtocolMode, ProtocolTemplate, TemplateKind};
pub use state::{DeviceFields, Step, WizardAction, WizardState};
pub use submission::{
    DEVICE_LIST_ROUTE, DeviceCreator, Navigator, Notifier, SUCCESS_MESSAGE, build_and_submit, submit_draft,
};

#[cfg(any(test, feature = "testing"))]
pub use submission::{MockDeviceCreator, MockNavigator, MockNotifier};
