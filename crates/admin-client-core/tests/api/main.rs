mod bootstrap;
mod login;
mod menu;
mod notifications;
