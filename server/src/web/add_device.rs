use device_wizard::{
    AdminState, FrequencyUnit, OperatingState, ProfileRef, ProtocolMode, ServiceRef, Step, TemplateKind,
    WizardAction, WizardState, submit_draft,
};
use leptos::*;
use leptos_router::{use_location, use_navigate, use_query_map};
use tracing::{debug, warn};

use crate::web::api_client::ApiClient;
use crate::web::components::{
    ProfilePicker, RouterNavigator, ServicePicker, StepIndicator, Toast, ToastNotifier, ToastView,
};

/// Multi-step form that registers a new device with core-metadata.
///
/// Opening it as `add-device?from=<name>` copies the auto events of an
/// existing device into the auto-event page.
#[component]
pub fn AddDevice() -> impl IntoView {
    let wizard = create_rw_signal(WizardState::new());
    let toast = create_rw_signal(None::<Toast>);
    let (services, set_services) = create_signal(Vec::<ServiceRef>::new());
    let (profiles, set_profiles) = create_signal(Vec::<ProfileRef>::new());

    let step = create_memo(move |_| wizard.with(|state| state.current_step()));
    let can_advance = create_memo(move |_| wizard.with(|state| state.can_advance_current()));
    let submitting = create_memo(move |_| wizard.with(|state| state.is_submitting()));

    spawn_local(async move {
        match ApiClient::get_device_services().await {
            Ok(list) => set_services.set(list),
            Err(e) => toast.set(Some(Toast::error(e))),
        }
    });
    spawn_local(async move {
        match ApiClient::get_device_profiles().await {
            Ok(list) => set_profiles.set(list),
            Err(e) => toast.set(Some(Toast::error(e))),
        }
    });

    let query = use_query_map();
    create_effect(move |_| {
        let Some(from) = query.with(|q| q.get("from").cloned()) else {
            return;
        };
        spawn_local(async move {
            match ApiClient::get_device(&from).await {
                Ok(device) => {
                    debug!("Copying {} auto events from '{}'", device.auto_events.len(), from);
                    wizard.update(|state| state.update(WizardAction::LoadAutoEvents(device.auto_events)));
                }
                Err(e) => {
                    warn!("Unable to load device '{}': {}", from, e);
                    toast.set(Some(Toast::error(e)));
                }
            }
        });
    });

    let navigate = use_navigate();
    let location = use_location();
    let finish = move |_| {
        let Some(started) = wizard.try_update(|state| state.begin_submit()) else {
            return;
        };
        let device = match started {
            Ok(device) => device,
            Err(e) => {
                debug!("Submission not started: {}", e);
                return;
            }
        };

        let notifier = ToastNotifier::new(toast);
        let navigator = RouterNavigator::new(location.pathname.get_untracked(), navigate.clone());
        spawn_local(async move {
            match submit_draft(device, &ApiClient, &notifier, &navigator).await {
                Ok(id) => debug!("Add device finished with id {}", id),
                Err(e) => debug!("Add device finished with error: {}", e),
            }
            let _ = wizard.try_update(WizardState::finish_submit);
        });
    };

    let dispatch = move |action: WizardAction| wizard.update(|state| state.update(action));

    view! {
        <div class="row">
            <div class="col-12">
                <h1 class="h3 mb-4">"Add Device"</h1>
                <ToastView toast=toast/>
                <StepIndicator current=step/>

                <div class="card mb-3">
                    <div class="card-body">
                        <Show when=move || step.get() == Step::SelectService.index()>
                            <ServicePicker
                                services=services
                                selected=Signal::derive(move || {
                                    wizard.with(|s| s.selected_service().map(|svc| svc.name.clone()))
                                })
                                on_select=Callback::new(move |svc| dispatch(WizardAction::SelectService(svc)))
                            />
                        </Show>
                        <Show when=move || step.get() == Step::SelectProfile.index()>
                            <ProfilePicker
                                profiles=profiles
                                selected=Signal::derive(move || {
                                    wizard.with(|s| s.selected_profile().map(|p| p.name.clone()))
                                })
                                on_select=Callback::new(move |p| dispatch(WizardAction::SelectProfile(p)))
                            />
                        </Show>
                        <Show when=move || step.get() == Step::DeviceInfo.index()>
                            <DeviceInfoStep wizard=wizard/>
                        </Show>
                        <Show when=move || step.get() == Step::AutoEvents.index()>
                            <AutoEventStep wizard=wizard/>
                        </Show>
                        <Show when=move || step.get() == Step::Protocols.index()>
                            <ProtocolStep wizard=wizard/>
                        </Show>
                    </div>
                </div>

                <div class="d-flex gap-2">
                    <button
                        class="btn btn-outline-secondary"
                        disabled=move || step.get() == 0
                        on:click=move |_| dispatch(WizardAction::Retreat)
                    >
                        "Previous"
                    </button>
                    <Show when=move || step.get() == Step::AutoEvents.index()>
                        <button class="btn btn-outline-warning" on:click=move |_| dispatch(WizardAction::SkipCurrentStep)>
                            "Skip"
                        </button>
                    </Show>
                    <Show
                        when=move || step.get() == Step::LAST.index()
                        fallback=move || view! {
                            <button
                                class="btn btn-primary"
                                disabled=move || !can_advance.get()
                                on:click=move |_| dispatch(WizardAction::Advance)
                            >
                                "Next"
                            </button>
                        }
                    >
                        <button class="btn btn-success" disabled=move || submitting.get() on:click=finish.clone()>
                            "Done"
                        </button>
                    </Show>
                </div>
            </div>
        </div>
    }
}

#[component]
fn DeviceInfoStep(wizard: RwSignal<WizardState>) -> impl IntoView {
    let dispatch = move |action: WizardAction| wizard.update(|state| state.update(action));

    view! {
        <div class="row g-3">
            <div class="col-md-6">
                <label class="form-label">"Name"</label>
                <input
                    class="form-control"
                    type="text"
                    prop:value=move || wizard.with(|s| s.device().name.clone())
                    on:input=move |ev| dispatch(WizardAction::SetName(event_target_value(&ev)))
                />
            </div>
            <div class="col-md-6">
                <label class="form-label">"Labels"</label>
                <input
                    class="form-control"
                    type="text"
                    placeholder="comma separated"
                    prop:value=move || wizard.with(|s| s.device().labels.clone().unwrap_or_default())
                    on:input=move |ev| dispatch(WizardAction::SetLabels(event_target_value(&ev)))
                />
            </div>
            <div class="col-12">
                <label class="form-label">"Description"</label>
                <input
                    class="form-control"
                    type="text"
                    prop:value=move || wizard.with(|s| s.device().description.clone())
                    on:input=move |ev| dispatch(WizardAction::SetDescription(event_target_value(&ev)))
                />
            </div>
            <div class="col-md-6">
                <label class="form-label">"Admin State"</label>
                <select
                    class="form-select"
                    prop:value=move || wizard.with(|s| s.device().admin_state.as_str())
                    on:change=move |ev| {
                        let state = match event_target_value(&ev).as_str() {
                            "LOCKED" => AdminState::Locked,
                            _ => AdminState::Unlocked,
                        };
                        dispatch(WizardAction::SetAdminState(state));
                    }
                >
                    <option value="UNLOCKED">"UNLOCKED"</option>
                    <option value="LOCKED">"LOCKED"</option>
                </select>
            </div>
            <div class="col-md-6">
                <label class="form-label">"Operating State"</label>
                <select
                    class="form-select"
                    prop:value=move || wizard.with(|s| s.device().operating_state.as_str())
                    on:change=move |ev| {
                        let state = match event_target_value(&ev).as_str() {
                            "DOWN" => OperatingState::Down,
                            "UNKNOWN" => OperatingState::Unknown,
                            _ => OperatingState::Up,
                        };
                        dispatch(WizardAction::SetOperatingState(state));
                    }
                >
                    <option value="UP">"UP"</option>
                    <option value="DOWN">"DOWN"</option>
                    <option value="UNKNOWN">"UNKNOWN"</option>
                </select>
            </div>
        </div>
    }
}

#[component]
fn AutoEventStep(wizard: RwSignal<WizardState>) -> impl IntoView {
    let dispatch = move |action: WizardAction| wizard.update(|state| state.update(action));
    let entry_ids = move || {
        wizard.with(|s| s.auto_events().entries().iter().map(|entry| entry.id).collect::<Vec<_>>())
    };

    view! {
        <table class="table align-middle">
            <thead>
                <tr>
                    <th>"Resource"</th>
                    <th>"Frequency"</th>
                    <th>"Unit"</th>
                    <th>"On Change"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                <For
                    each=entry_ids
                    key=|id| *id
                    children=move |id| view! { <AutoEventRow wizard=wizard id=id/> }
                />
            </tbody>
        </table>
        <button class="btn btn-outline-primary btn-sm" on:click=move |_| dispatch(WizardAction::AddAutoEvent)>
            <i class="bi bi-plus-lg me-1"></i>
            "Add Auto Event"
        </button>
    }
}

#[component]
fn AutoEventRow(wizard: RwSignal<WizardState>, id: u64) -> impl IntoView {
    let dispatch = move |action: WizardAction| wizard.update(|state| state.update(action));
    let entry = create_memo(move |_| {
        wizard.with(|s| s.auto_events().entries().iter().find(|entry| entry.id == id).cloned())
    });

    view! {
        <tr>
            <td>
                <input
                    class="form-control form-control-sm"
                    type="text"
                    prop:value=move || entry.get().map(|e| e.resource_name).unwrap_or_default()
                    on:input=move |ev| dispatch(WizardAction::SetAutoEventResource {
                        id,
                        resource: event_target_value(&ev),
                    })
                />
            </td>
            <td>
                <input
                    class="form-control form-control-sm"
                    type="text"
                    class:is-invalid=move || {
                        entry.get().is_some_and(|e| {
                            !e.frequency_value.is_empty()
                                && !device_wizard::is_integer_frequency(&e.frequency_value)
                        })
                    }
                    prop:value=move || entry.get().map(|e| e.frequency_value).unwrap_or_default()
                    on:input=move |ev| dispatch(WizardAction::SetAutoEventFrequency {
                        id,
                        value: event_target_value(&ev),
                    })
                />
            </td>
            <td>
                <select
                    class="form-select form-select-sm"
                    prop:value=move || entry.get().map(|e| e.unit.as_str()).unwrap_or_default()
                    on:change=move |ev| {
                        if let Ok(unit) = event_target_value(&ev).parse::<FrequencyUnit>() {
                            dispatch(WizardAction::SetAutoEventUnit { id, unit });
                        }
                    }
                >
                    {FrequencyUnit::ALL
                        .into_iter()
                        .map(|unit| view! { <option value=unit.as_str()>{unit.as_str()}</option> })
                        .collect_view()}
                </select>
            </td>
            <td>
                <input
                    class="form-check-input"
                    type="checkbox"
                    prop:checked=move || entry.get().is_some_and(|e| e.on_change)
                    on:change=move |ev| dispatch(WizardAction::SetAutoEventOnChange {
                        id,
                        on_change: event_target_checked(&ev),
                    })
                />
            </td>
            <td>
                <button class="btn btn-link text-danger" on:click=move |_| dispatch(WizardAction::RemoveAutoEvent(id))>
                    <i class="bi bi-trash"></i>
                </button>
            </td>
        </tr>
    }
}

#[component]
fn ProtocolStep(wizard: RwSignal<WizardState>) -> impl IntoView {
    let dispatch = move |action: WizardAction| wizard.update(|state| state.update(action));
    let mode = create_memo(move |_| wizard.with(|s| s.protocol().mode()));

    view! {
        <div class="mb-3">
            <div class="form-check form-check-inline">
                <input
                    class="form-check-input"
                    type="radio"
                    name="protocol-mode"
                    prop:checked=move || mode.get() == ProtocolMode::Template
                    on:change=move |_| dispatch(WizardAction::SwitchProtocolMode(ProtocolMode::Template))
                />
                <label class="form-check-label">"Template"</label>
            </div>
            <div class="form-check form-check-inline">
                <input
                    class="form-check-input"
                    type="radio"
                    name="protocol-mode"
                    prop:checked=move || mode.get() == ProtocolMode::Custom
                    on:change=move |_| dispatch(WizardAction::SwitchProtocolMode(ProtocolMode::Custom))
                />
                <label class="form-check-label">"Custom"</label>
            </div>
        </div>

        <Show
            when=move || mode.get() == ProtocolMode::Template
            fallback=move || view! { <CustomProtocol wizard=wizard/> }
        >
            <TemplateProtocol wizard=wizard/>
        </Show>
    }
}

#[component]
fn TemplateProtocol(wizard: RwSignal<WizardState>) -> impl IntoView {
    let dispatch = move |action: WizardAction| wizard.update(|state| state.update(action));

    view! {
        <div class="mb-3">
            <label class="form-label">"Protocol"</label>
            <select
                class="form-select"
                prop:value=move || wizard.with(|s| s.protocol().name().to_string())
                on:change=move |ev| dispatch(WizardAction::SelectTemplate(event_target_value(&ev)))
            >
                <option value="">"Select a template"</option>
                {TemplateKind::ALL
                    .into_iter()
                    .map(|kind| view! { <option value=kind.as_str()>{kind.label()}</option> })
                    .collect_view()}
            </select>
        </div>
        <div class="row g-3">
            <For
                each=move || wizard.with(|s| s.protocol().field_names())
                key=|field| *field
                children=move |field: &'static str| view! {
                    <div class="col-md-4">
                        <label class="form-label">{field}</label>
                        <input
                            class="form-control"
                            type="text"
                            prop:value=move || {
                                wizard.with(|s| s.protocol().template().get(field).unwrap_or_default().to_string())
                            }
                            on:input=move |ev| dispatch(WizardAction::SetTemplateField {
                                field: field.to_string(),
                                value: event_target_value(&ev),
                            })
                        />
                    </div>
                }
            />
        </div>
    }
}

#[component]
fn CustomProtocol(wizard: RwSignal<WizardState>) -> impl IntoView {
    let dispatch = move |action: WizardAction| wizard.update(|state| state.update(action));
    let property_ids = move || {
        wizard.with(|s| s.protocol().custom_properties().iter().map(|p| p.id).collect::<Vec<_>>())
    };
    let property = move |id: u64| {
        wizard.with(|s| s.protocol().custom_properties().iter().find(|p| p.id == id).cloned())
    };

    view! {
        <div class="mb-3">
            <label class="form-label">"Protocol Name"</label>
            <input
                class="form-control"
                type="text"
                prop:value=move || wizard.with(|s| s.protocol().name().to_string())
                on:input=move |ev| dispatch(WizardAction::SetProtocolName(event_target_value(&ev)))
            />
        </div>
        <For
            each=property_ids
            key=|id| *id
            children=move |id| view! {
                <div class="input-group mb-2">
                    <input
                        class="form-control"
                        type="text"
                        placeholder="key"
                        prop:value=move || property(id).map(|p| p.key).unwrap_or_default()
                        on:input=move |ev| dispatch(WizardAction::SetCustomKey { id, key: event_target_value(&ev) })
                    />
                    <input
                        class="form-control"
                        type="text"
                        placeholder="value"
                        prop:value=move || property(id).map(|p| p.value).unwrap_or_default()
                        on:input=move |ev| dispatch(WizardAction::SetCustomValue { id, value: event_target_value(&ev) })
                    />
                    <button class="btn btn-outline-danger" on:click=move |_| dispatch(WizardAction::RemoveCustomProperty(id))>
                        <i class="bi bi-dash-lg"></i>
                    </button>
                </div>
            }
        />
        <div class="d-flex gap-2">
            <button class="btn btn-outline-primary btn-sm" on:click=move |_| dispatch(WizardAction::AddCustomProperty)>
                <i class="bi bi-plus-lg me-1"></i>
                "Add Property"
            </button>
            <button class="btn btn-outline-secondary btn-sm" on:click=move |_| dispatch(WizardAction::ResetCustomProperties)>
                "Reset"
            </button>
        </div>
    }
}
