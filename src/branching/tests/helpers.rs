//! Shared fixtures for branching tests.

use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;

use crate::branching::adapters::InMemoryDepot;
use crate::branching::domain::{
    BranchRequest, Changelevel, Child, DepotLayout, Parent, Project,
};

pub(crate) const DEPOT: &str = "//info.ravenbrook.com";
pub(crate) const PROJECT_ROOT: &str = "//info.ravenbrook.com/project/widget";
pub(crate) const MASTER: &str = "//info.ravenbrook.com/project/widget/master";
pub(crate) const CUSTOM_MAIN: &str = "//info.ravenbrook.com/project/widget/custom/acme/main";
pub(crate) const BRANCH_INDEX: &str = "//info.ravenbrook.com/project/widget/branch/index.html";
pub(crate) const VERSION_INDEX: &str = "//info.ravenbrook.com/project/widget/version/index.html";
pub(crate) const PUSHES: &str = "//info.ravenbrook.com/infosys/robots/git-fusion/etc/pushes";

/// Version file carrying the release marker for 1.117.
pub(crate) const VERSION_C: &str = concat!(
    "/* version.c -- version implementation */\n",
    "#define MPS_RELEASE \"release/1.117.0\"\n",
    "#define MPS_COPYRIGHT \"Copyright example\"\n",
);

/// Index document with an empty table.
pub(crate) const INDEX_TABLE: &str = concat!(
    "<html>\n",
    "<table>\n",
    "  <tr><th>Branch</th></tr>\n",
    "</table>\n",
    "</html>\n",
);

/// Push-tracking artifact with one historical record.
pub(crate) const PUSHES_SEED: &str =
    "widget-version-1.0\tgit@github.com:Ravenbrook/mps-temporary.git\tversion/1.0\n";

/// Clock pinned at midnight UTC on the given date.
pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn clock_at(date: &str) -> FixedClock {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid test date");
    let midnight = day.and_hms_opt(0, 0, 0).expect("valid midnight");
    FixedClock(midnight.and_utc())
}

/// Depot with project `widget`, a `master` mainline at changelevel 1042,
/// and a version file carrying release 1.117 at changelevel 1040.
pub(crate) fn widget_depot() -> InMemoryDepot {
    let depot = InMemoryDepot::new();
    depot.add_directory(PROJECT_ROOT);
    depot.add_directory(MASTER);
    depot.add_file(&format!("{MASTER}/code/version.c"), 1040, VERSION_C);
    depot.record_change(1042, &[&format!("{MASTER}/code/main.c")]);
    depot
}

/// Adds the customer mainline `custom/acme/main` at changelevel 1041.
pub(crate) fn add_custom_mainline(depot: &InMemoryDepot) {
    depot.add_directory(CUSTOM_MAIN);
    depot.add_file(&format!("{CUSTOM_MAIN}/code/version.c"), 1041, VERSION_C);
}

/// Seeds the tracked artifacts the registration stage edits.
pub(crate) fn add_artifacts(depot: &InMemoryDepot) {
    depot.add_file(BRANCH_INDEX, 900, INDEX_TABLE);
    depot.add_file(VERSION_INDEX, 901, INDEX_TABLE);
    depot.add_file(PUSHES, 902, PUSHES_SEED);
}

/// A frozen request for project `widget` at changelevel 1042.
pub(crate) fn frozen_request(parent: &str, child: &str, commit: bool) -> BranchRequest {
    let parent = Parent::parse(parent).expect("valid test parent");
    let child = Child::parse(child).expect("valid test child");
    let description = format!("Branching {parent} to {child}.");
    BranchRequest::new(
        DepotLayout::default(),
        Project::new("widget").expect("valid test project"),
        parent,
        Changelevel::new(1042),
        child,
        description,
        commit,
    )
}
