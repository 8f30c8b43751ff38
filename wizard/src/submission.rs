use async_trait::async_trait;
use tracing::{error, info};

use crate::error::{Result, WizardError};
use crate::models::Device;
use crate::state::WizardState;

/// Notification shown once the device has been created
pub const SUCCESS_MESSAGE: &str = "Add device";

/// Route opened after a successful creation, relative to the wizard's route
pub const DEVICE_LIST_ROUTE: &str = "../device-list";

/// Backend call that creates a device. Returns the new device id.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DeviceCreator: Send + Sync {
    async fn add_device(&self, device: Device) -> Result<String>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Navigator {
    fn navigate_relative(&self, path: &str);
}

impl WizardState {
    /// Assemble the device payload from the current state. Never fails, so a
    /// state that bypassed the step gate still produces a payload.
    pub fn build_device_draft(&self) -> Device {
        Device {
            name: self.device.name.clone(),
            description: self.device.description.clone(),
            labels: self
                .device
                .labels
                .as_ref()
                .map(|labels| labels.split(',').map(str::to_string).collect()),
            admin_state: self.device.admin_state,
            operating_state: self.device.operating_state,
            service_name: self
                .selected_service()
                .map(|service| service.name.clone())
                .unwrap_or_default(),
            profile_name: self
                .selected_profile()
                .map(|profile| profile.name.clone())
                .unwrap_or_default(),
            protocols: self.protocol.to_protocols(),
            auto_events: self.auto_events.to_auto_events(),
        }
    }

    /// Build the draft and mark a submission in flight. A second call before
    /// `finish_submit` is refused.
    pub fn begin_submit(&mut self) -> Result<Device> {
        if self.submitting {
            return Err(WizardError::SubmitInFlight);
        }
        let device = self.build_device_draft();
        self.submitting = true;
        Ok(device)
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

/// Send a built device and report the outcome to the operator.
pub async fn submit_draft<C, N, R>(device: Device, creator: &C, notifier: &N, navigator: &R) -> Result<String>
where
    C: DeviceCreator + ?Sized,
    N: Notifier + ?Sized,
    R: Navigator + ?Sized,
{
    let name = device.name.clone();
    match creator.add_device(device).await {
        Ok(id) => {
            info!("Created device '{}' with id {}", name, id);
            notifier.success(SUCCESS_MESSAGE);
            navigator.navigate_relative(DEVICE_LIST_ROUTE);
            Ok(id)
        }
        Err(e) => {
            error!("Failed to create device '{}': {}", name, e);
            notifier.error(&e.to_string());
            Err(e)
        }
    }
}

/// Complete the wizard: assemble, submit, then clear the in-flight flag.
pub async fn build_and_submit<C, N, R>(
    state: &mut WizardState,
    creator: &C,
    notifier: &N,
    navigator: &R,
) -> Result<String>
where
    C: DeviceCreator + ?Sized,
    N: Notifier + ?Sized,
    R: Navigator + ?Sized,
{
    let device = state.begin_submit()?;
    let result = submit_draft(device, creator, notifier, navigator).await;
    state.finish_submit();
    result
}
