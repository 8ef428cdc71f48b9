#![allow(dead_code)]

pub mod gate;
