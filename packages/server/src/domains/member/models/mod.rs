pub mod member;

pub use member::{Member, MemberKey, MemberPatch, NewMember, Role, ServerNow};
