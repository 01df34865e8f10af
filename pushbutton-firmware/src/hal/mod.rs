// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus pushbutton-core für die echte Hardware.
// Die Tests im pushbutton-tests Crate nutzen stattdessen MockGpio.

pub mod gpio;

pub use gpio::{EspButton, EspGpio, EspLed, install_edge_handler};
