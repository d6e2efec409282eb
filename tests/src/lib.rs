
mod connect;
mod fund;
mod views;
mod withdraw;
