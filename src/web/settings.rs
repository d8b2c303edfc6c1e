//! Account settings pages.
//!
//! All of them require `auth`. `/settings` itself only redirects to the
//! profile page.

use {
    super::AppState,
    crate::{AUTH, Page, PageContext, Result, Route, RouteTableBuilder, redirect_found},
    axum::{extract::State, response::Response},
};

/// Registers the settings routes.
pub fn routes(routes: &mut RouteTableBuilder<AppState>) -> Result<()> {
    routes.group(&[AUTH], |routes| {
        routes
            .register(Route::get("/settings", "settings", settings))?
            .register(Route::get("/settings/profile", "settings.profile", profile).name("profile.edit"))?
            .register(
                Route::get("/settings/password", "settings.password", password)
                    .name("password.edit"),
            )?
            .register(
                Route::get("/settings/appearance", "settings.appearance", appearance)
                    .name("appearance"),
            )?;
        Ok(())
    })?;
    Ok(())
}

async fn settings() -> Response {
    redirect_found("/settings/profile")
}

async fn profile(State(state): State<AppState>, cx: PageContext) -> Response {
    state.renderer.render(&cx, Page::new("settings/profile"))
}

async fn password(State(state): State<AppState>, cx: PageContext) -> Response {
    state.renderer.render(&cx, Page::new("settings/password"))
}

async fn appearance(State(state): State<AppState>, cx: PageContext) -> Response {
    state.renderer.render(&cx, Page::new("settings/appearance"))
}
