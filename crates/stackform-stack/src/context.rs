//! Deployment identity a workload is converted for.

use crate::fields::AppInformation;

/// Where the workload is deployed. Owned by the caller, read-only during
/// conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertContext {
    pub app: String,
    pub env: String,
    pub account_id: String,
    pub region: String,
    pub app_info: AppInformation,
}

impl ConvertContext {
    pub fn new(
        app: impl Into<String>,
        env: impl Into<String>,
        account_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        let app = app.into();
        ConvertContext {
            app_info: AppInformation {
                name: app.clone(),
                ..Default::default()
            },
            app,
            env: env.into(),
            account_id: account_id.into(),
            region: region.into(),
        }
    }

    pub fn with_app_info(mut self, app_info: AppInformation) -> Self {
        self.app_info = app_info;
        self
    }
}
