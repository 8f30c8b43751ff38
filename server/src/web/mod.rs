// Main app module - needs to compile for server SSR
pub mod app;

// Client-side modules - only compile for WASM target
#[cfg(target_arch = "wasm32")]
pub mod add_device;
#[cfg(target_arch = "wasm32")]
pub mod api_client;
#[cfg(target_arch = "wasm32")]
pub mod components;

// Server-side stubs render a placeholder until the client hydrates
#[cfg(not(target_arch = "wasm32"))]
pub mod add_device {
    use leptos::*;

    #[component]
    pub fn AddDevice() -> impl IntoView {
        view! {
            <div class="loading">"Loading add device wizard..."</div>
        }
    }
}

/// Resolve a route relative to the current route: each `..` drops one
/// trailing segment, other segments are appended.
pub fn resolve_relative(current: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        return relative.to_string();
    }

    let mut segments: Vec<&str> = current.split('/').filter(|s| !s.is_empty()).collect();

    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}
