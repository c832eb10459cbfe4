mod common;
mod controller;
mod routing;
