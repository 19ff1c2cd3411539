mod accounts;
mod bus;
mod helpers;
mod mocks;
mod orders;
