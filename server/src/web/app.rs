use leptos::*;
use leptos_meta::*;
use leptos_router::*;
use crate::web::add_device::AddDevice;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Html lang="en" dir="ltr" attr:data-theme="light"/>
        <Title text="EdgeX Console - Device Management"/>
        <Meta charset="utf-8"/>
        <Meta name="viewport" content="width=device-width, initial-scale=1"/>
        <Meta name="description" content="Manage devices registered with core-metadata"/>

        <Link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css"/>
        <Link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.0/font/bootstrap-icons.css"/>
        <Link rel="stylesheet" href="/assets/app.css"/>

        <Body class="bg-light"/>
        <Router>
            <Routes>
                <Route path="/" view=MainLayout>
                    <Route path="" view=|| view! { <Redirect path="/metadata/device-list"/> }/>
                    <Route path="/metadata/add-device" view=AddDevice/>
                    <Route path="/metadata/device-list" view=DeviceList/>
                </Route>
            </Routes>
        </Router>
    }
}

#[component]
fn MainLayout() -> impl IntoView {
    view! {
        <div class="d-flex vh-100">
            <Sidebar/>
            <main class="flex-grow-1 overflow-auto">
                <Header/>
                <div class="container-fluid p-4">
                    <Outlet/>
                </div>
            </main>
        </div>
    }
}

/// Landing page after a device is created
#[component]
fn DeviceList() -> impl IntoView {
    view! {
        <div class="row">
            <div class="col-12">
                <div class="d-flex justify-content-between align-items-center mb-4">
                    <h1 class="h3 mb-0">"Devices"</h1>
                    <A href="/metadata/add-device" class="btn btn-primary">
                        <i class="bi bi-plus-lg me-1"></i>
                        "Add Device"
                    </A>
                </div>
                <div class="card">
                    <div class="card-body text-center py-5">
                        <i class="bi bi-hdd-network text-muted" style="font-size: 3rem;"></i>
                        <h5 class="card-title mt-3">"Device list"</h5>
                        <p class="card-text text-muted">"Devices are managed by core-metadata."</p>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[component]
fn Header() -> impl IntoView {
    view! {
        <header class="bg-white border-bottom shadow-sm">
            <div class="container-fluid">
                <div class="d-flex align-items-center py-3">
                    <div class="text-primary me-2">
                        <i class="bi bi-cpu fs-4"></i>
                    </div>
                    <div>
                        <h1 class="h5 mb-0 fw-bold text-dark">"EdgeX Console"</h1>
                        <small class="text-muted">"Device Management"</small>
                    </div>
                </div>
            </div>
        </header>
    }
}

#[component]
fn Sidebar() -> impl IntoView {
    view! {
        <nav class="bg-dark text-white p-3" style="width: 240px;">
            <div class="mb-4">
                <h6 class="text-uppercase text-white-50 small">"Metadata"</h6>
            </div>
            <ul class="nav nav-pills flex-column">
                <li class="nav-item">
                    <A href="/metadata/device-list" class="nav-link text-white">
                        <i class="bi bi-hdd-stack me-2"></i>
                        "Devices"
                    </A>
                </li>
                <li class="nav-item">
                    <A href="/metadata/add-device" class="nav-link text-white">
                        <i class="bi bi-plus-square me-2"></i>
                        "Add Device"
                    </A>
                </li>
            </ul>
        </nav>
    }
}
