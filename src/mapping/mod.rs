//! Modul für die Umwandlung dekodierter Frames in Ausgabe-Aktionen.
//!
//! Zwei Kanäle: die Lenkung wird über Deadzone und Sensitivität auf den
//! 16-Bit-Achsenbereich des virtuellen Controllers skaliert, die Pedale
//! laufen über eine kleine State Machine, die höchstens eine der beiden
//! Tasten (Gas/Bremse) gedrückt hält.

pub mod pedals;
pub mod steering;

// Re-exports für einfacheren Zugriff
pub use pedals::{release_all, PedalState, Pedals};
pub use steering::axis_value;
