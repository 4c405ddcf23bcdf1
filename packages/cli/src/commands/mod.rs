pub mod edit;
pub mod graph;
pub mod init;
pub mod play;
pub mod show;
pub mod store;
pub mod suggestions;
pub mod vote;

pub use edit::{edit, EditArgs};
pub use graph::{graph, GraphArgs};
pub use init::{init, InitArgs};
pub use play::{play, PlayArgs};
pub use show::{show, ShowArgs};
pub use suggestions::{suggestions, SuggestionsArgs};
pub use vote::{vote, VoteArgs};
