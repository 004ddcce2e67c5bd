//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter     | Implements   | Connects to                    |
//! |-------------|--------------|--------------------------------|
//! | `sim_bus`   | BusFactory   | in-memory IMX708 register file |
//! | `time`      | DelayNs      | `std::thread::sleep`           |
//! | `linux_i2c` | BusFactory   | `/dev/i2c-N` (feature `linux`) |

#[cfg(feature = "linux")]
pub mod linux_i2c;
pub mod sim_bus;
pub mod time;
