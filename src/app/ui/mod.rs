mod controls;
mod inspector;
mod panels;
