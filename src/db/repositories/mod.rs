mod labels;
mod question_answer_pairs;
mod tickets;
