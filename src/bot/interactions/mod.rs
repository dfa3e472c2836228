pub mod reset_buttons;
