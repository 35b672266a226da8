pub mod label;
pub mod question_answer_pair;
pub mod ticket;
pub mod timestamp;

pub use label::{Label, LabelInput, LabelUpdate};
pub use question_answer_pair::{QuestionAnswerInput, QuestionAnswerPair};
pub use ticket::{Ticket, TicketInput, TicketLabel, TicketState, TicketUpdate};
pub use timestamp::{day_start, Timestamp};
