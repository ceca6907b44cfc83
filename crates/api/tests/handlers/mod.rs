mod activation_test;
mod password_reset_test;
