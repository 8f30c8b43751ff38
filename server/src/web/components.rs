use device_wizard::{Navigator, Notifier, ProfileRef, ServiceRef, Step};
use leptos::*;
use leptos_router::NavigateOptions;
use std::rc::Rc;
use tracing::info;

use crate::web::resolve_relative;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Error, message: message.into() }
    }
}

/// Shows wizard notifications in the page toast
#[derive(Clone, Copy)]
pub struct ToastNotifier {
    toast: RwSignal<Option<Toast>>,
}

impl ToastNotifier {
    pub fn new(toast: RwSignal<Option<Toast>>) -> Self {
        Self { toast }
    }
}

impl Notifier for ToastNotifier {
    fn success(&self, message: &str) {
        self.toast.set(Some(Toast::success(message)));
    }

    fn error(&self, message: &str) {
        self.toast.set(Some(Toast::error(message)));
    }
}

/// Navigates relative to the route the wizard was opened on
pub struct RouterNavigator {
    current: String,
    navigate: Rc<dyn Fn(&str)>,
}

impl RouterNavigator {
    pub fn new(current: String, navigate: impl Fn(&str, NavigateOptions) + 'static) -> Self {
        Self {
            current,
            navigate: Rc::new(move |path| navigate(path, NavigateOptions::default())),
        }
    }
}

impl Navigator for RouterNavigator {
    fn navigate_relative(&self, path: &str) {
        let target = resolve_relative(&self.current, path);
        info!("Navigating to {}", target);
        (self.navigate)(&target);
    }
}

#[component]
pub fn ToastView(toast: RwSignal<Option<Toast>>) -> impl IntoView {
    view! {
        {move || toast.get().map(|t| {
            let class = match t.kind {
                ToastKind::Success => "alert alert-success alert-dismissible",
                ToastKind::Error => "alert alert-danger alert-dismissible",
            };
            view! {
                <div class=class role="alert">
                    {t.message}
                    <button type="button" class="btn-close" on:click=move |_| toast.set(None)></button>
                </div>
            }
        })}
    }
}

#[component]
pub fn StepIndicator(#[prop(into)] current: Signal<i32>) -> impl IntoView {
    view! {
        <ol class="list-group list-group-horizontal mb-4">
            {Step::ALL
                .into_iter()
                .map(|step| {
                    let index = step.index();
                    view! {
                        <li
                            class="list-group-item flex-fill text-center"
                            class:active=move || current.get() == index
                            class:text-muted=move || current.get() < index
                        >
                            <span class="badge bg-secondary me-2">{index + 1}</span>
                            {step.title()}
                        </li>
                    }
                })
                .collect_view()}
        </ol>
    }
}

#[component]
pub fn ServicePicker(
    #[prop(into)] services: Signal<Vec<ServiceRef>>,
    #[prop(into)] selected: Signal<Option<String>>,
    on_select: Callback<ServiceRef>,
) -> impl IntoView {
    view! {
        <div class="list-group">
            <For
                each=move || services.get()
                key=|service| service.name.clone()
                children=move |service| {
                    let name = service.name.clone();
                    let label = service.name.clone();
                    let description = service.description.clone();
                    let address = service.base_address.clone();
                    view! {
                        <button
                            type="button"
                            class="list-group-item list-group-item-action"
                            class:active=move || selected.get().as_deref() == Some(name.as_str())
                            on:click=move |_| on_select.call(service.clone())
                        >
                            <div class="fw-semibold">{label}</div>
                            <small class="d-block">{description}</small>
                            <small class="text-muted">{address}</small>
                        </button>
                    }
                }
            />
        </div>
    }
}

#[component]
pub fn ProfilePicker(
    #[prop(into)] profiles: Signal<Vec<ProfileRef>>,
    #[prop(into)] selected: Signal<Option<String>>,
    on_select: Callback<ProfileRef>,
) -> impl IntoView {
    view! {
        <div class="list-group">
            <For
                each=move || profiles.get()
                key=|profile| profile.name.clone()
                children=move |profile| {
                    let name = profile.name.clone();
                    let label = profile.name.clone();
                    let description = profile.description.clone();
                    let detail = format!("{} {}", profile.manufacturer, profile.model);
                    view! {
                        <button
                            type="button"
                            class="list-group-item list-group-item-action"
                            class:active=move || selected.get().as_deref() == Some(name.as_str())
                            on:click=move |_| on_select.call(profile.clone())
                        >
                            <div class="fw-semibold">{label}</div>
                            <small class="d-block">{description}</small>
                            <small class="text-muted">{detail}</small>
                        </button>
                    }
                }
            />
        </div>
    }
}
