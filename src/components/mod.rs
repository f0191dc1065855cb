//! UI Components
//!
//! Board views and the chat panel. Views read the store and send every
//! change through the mutation port.

mod board_header;
mod board_view;
mod chat_panel;
mod column_view;
mod comment_list;
mod confirm_remove;
mod deadline_picker;
mod error_banner;
mod file_list;
mod member_list;
mod priority_picker;
mod session_bar;
mod task_card;

pub use board_header::BoardHeader;
pub use board_view::{use_board_dnd, BoardView};
pub use chat_panel::ChatDock;
pub use column_view::ColumnView;
pub use comment_list::CommentList;
pub use confirm_remove::{ConfirmRemove, RemoveKind};
pub use deadline_picker::{format_deadline, is_overdue, DeadlinePicker};
pub use error_banner::ErrorBanner;
pub use file_list::FileList;
pub use member_list::MemberList;
pub use priority_picker::PriorityPicker;
pub use session_bar::SessionBar;
pub use task_card::TaskCard;
