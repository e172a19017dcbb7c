pub mod generate_answer_request;
pub mod generate_answer_route;
