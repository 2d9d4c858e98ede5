mod global {
    turf::style_sheet!("assets/global.css");
}

mod breadcrumbs {
    turf::style_sheet!("assets/breadcrumbs.css");
}

mod dashboard {
    turf::style_sheet!("assets/dashboard.css");
}

mod charts {
    turf::style_sheet!("assets/charts.css");
}

mod reports {
    turf::style_sheet!("assets/reports.css");
}

pub use breadcrumbs::ClassName as Breadcrumbs;
pub use charts::ClassName as Charts;
pub use dashboard::ClassName as Dashboard;
pub use global::ClassName as Layout;
pub use reports::ClassName as Reports;

use std::sync::LazyLock;

pub static ALL: LazyLock<String> = LazyLock::new(|| {
    [
        global::STYLE_SHEET,
        breadcrumbs::STYLE_SHEET,
        dashboard::STYLE_SHEET,
        charts::STYLE_SHEET,
        reports::STYLE_SHEET,
    ]
    .join("\n")
});
