pub mod lm75a;
