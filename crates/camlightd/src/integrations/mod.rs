pub mod elgato;
