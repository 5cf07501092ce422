mod bug_detail;
mod bug_list;

pub use bug_detail::BugDetailView;
pub use bug_list::BugListView;
