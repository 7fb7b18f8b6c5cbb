use crate::application::http::health::__path_health;
use crate::application::http::label_analysis::router::LabelAnalysisApiDoc;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NutriCheck API"
    ),
    paths(health),
    modifiers(&BearerSecurity)
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Full document: the base description plus every route module.
    pub fn full() -> utoipa::openapi::OpenApi {
        let mut openapi = ApiDoc::openapi();
        openapi.merge(LabelAnalysisApiDoc::openapi());
        openapi
    }
}
