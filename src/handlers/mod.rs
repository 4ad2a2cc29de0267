pub mod personalities;
