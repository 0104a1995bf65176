pub mod session_dto;
pub mod tutor_dto;
