pub mod attachment;
pub mod candidato;
pub mod client;
pub mod contract;
pub mod entrevista;
pub mod service;
pub mod user;
pub mod vaga;
