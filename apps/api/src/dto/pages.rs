use serde::Serialize;
use ts_rs::TS;

use super::ModuleResponse;

/// Page entry points behind the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/page-kind.ts"
)]
pub enum PageKind {
    Dashboard,
    ModuleList,
    RecordCreate,
    RecordDetail,
    RecordEdit,
    Admin,
}

/// Data a page renderer needs once the guard allowed the request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/page-response.ts"
)]
pub struct PageResponse {
    pub page: PageKind,
    pub module: Option<ModuleResponse>,
    pub record_id: Option<String>,
    pub section: Option<String>,
    /// Modules shown in the navigation menu, in navigation order.
    pub navigation: Vec<ModuleResponse>,
}
