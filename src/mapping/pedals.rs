//! Pedal-State-Machine: Gas und Bremse als exklusive virtuelle Tasten.
//!
//! Zustände: Idle, Accelerating, Braking. Übergänge werden ausschließlich
//! vom Kommando-Byte getrieben; unbekannte Kommandos ändern nichts.
//! Invariante: zu jedem Zeitpunkt ist höchstens eine der beiden Tasten auf
//! dem Output Sink gedrückt. Fehlgeschlagene Tastenereignisse werden
//! geloggt und beenden die Session nicht.

use crate::output::{KeySurface, PedalKey};
use crate::protocol::Command;
use tracing::{info, warn};

/// Aktueller Pedalzustand einer Session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PedalState {
    #[default]
    Idle,
    Accelerating,
    Braking,
}

/// Treiber für die Pedaltasten; besitzt den Zustand für die Lebensdauer
/// einer Verbindung.
#[derive(Debug, Default)]
pub struct Pedals {
    state: PedalState,
}

impl Pedals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PedalState {
        self.state
    }

    /// Wendet ein Kommando auf den Zustand an und setzt die Tasten passend.
    ///
    /// Beim Wechsel zwischen Gas und Bremse wird die alte Taste gelöst,
    /// bevor die neue gedrückt wird; dadurch ist nie ein Zwischenzustand
    /// mit zwei gedrückten Tasten beobachtbar.
    pub fn apply<K: KeySurface + ?Sized>(&mut self, command: Command, keys: &mut K) {
        match command {
            Command::Accelerate => {
                info!("Received ACCELERATE command");
                if self.state == PedalState::Braking {
                    release(keys, PedalKey::Brake);
                }
                if self.state != PedalState::Accelerating {
                    press(keys, PedalKey::Accelerate);
                }
                self.state = PedalState::Accelerating;
            }
            Command::Brake => {
                info!("Received BRAKE command");
                if self.state == PedalState::Accelerating {
                    release(keys, PedalKey::Accelerate);
                }
                if self.state != PedalState::Braking {
                    press(keys, PedalKey::Brake);
                }
                self.state = PedalState::Braking;
            }
            Command::Neutral => {
                info!("Received NEUTRAL command");
                match self.state {
                    PedalState::Accelerating => release(keys, PedalKey::Accelerate),
                    PedalState::Braking => release(keys, PedalKey::Brake),
                    PedalState::Idle => {}
                }
                self.state = PedalState::Idle;
            }
            Command::Unrecognized(_) => {}
        }
    }

    /// Löst beide Tasten und setzt den Zustand auf Idle zurück.
    ///
    /// Muss bei jedem Session-Ende laufen: der Output Sink überlebt die
    /// einzelne Verbindung.
    pub fn reset<K: KeySurface + ?Sized>(&mut self, keys: &mut K) {
        release_all(keys);
        self.state = PedalState::Idle;
    }
}

/// Löst beide Pedaltasten, unabhängig vom angenommenen Zustand.
///
/// Wird beim Prozessstart und beim Herunterfahren aufgerufen; die Tasten-
/// Schnittstelle ist idempotent, doppeltes Lösen ist in Ordnung.
pub fn release_all<K: KeySurface + ?Sized>(keys: &mut K) {
    release(keys, PedalKey::Accelerate);
    release(keys, PedalKey::Brake);
}

fn press<K: KeySurface + ?Sized>(keys: &mut K, key: PedalKey) {
    if let Err(e) = keys.press_key(key) {
        warn!("Failed to press {} key: {}", key, e);
    }
}

fn release<K: KeySurface + ?Sized>(keys: &mut K, key: PedalKey) {
    if let Err(e) = keys.release_key(key) {
        warn!("Failed to release {} key: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::testing::{RecordingSink, SinkAction};

    fn pedals_in(state: PedalState, sink: &mut RecordingSink) -> Pedals {
        let mut pedals = Pedals::new();
        match state {
            PedalState::Idle => {}
            PedalState::Accelerating => pedals.apply(Command::Accelerate, sink),
            PedalState::Braking => pedals.apply(Command::Brake, sink),
        }
        pedals
    }

    #[test]
    fn transition_table_holds_for_all_combinations() {
        let all_states = [
            PedalState::Idle,
            PedalState::Accelerating,
            PedalState::Braking,
        ];
        let cases = [
            (Command::Accelerate, PedalState::Accelerating),
            (Command::Brake, PedalState::Braking),
            (Command::Neutral, PedalState::Idle),
        ];
        for from in all_states {
            for (command, expected) in cases {
                let mut sink = RecordingSink::new();
                let mut pedals = pedals_in(from, &mut sink);
                pedals.apply(command, &mut sink);
                assert_eq!(pedals.state(), expected, "{:?} + {:?}", from, command);
                assert!(sink.pressed_now().len() <= 1);
            }
            // Unbekannte Kommandos lassen jeden Zustand unverändert
            let mut sink = RecordingSink::new();
            let mut pedals = pedals_in(from, &mut sink);
            let before = sink.actions().len();
            pedals.apply(Command::Unrecognized(b'x'), &mut sink);
            assert_eq!(pedals.state(), from);
            assert_eq!(sink.actions().len(), before);
        }
    }

    #[test]
    fn accelerate_brake_neutral_sequence_emits_exact_actions() {
        let mut sink = RecordingSink::new();
        let mut pedals = Pedals::new();

        pedals.apply(Command::Accelerate, &mut sink);
        pedals.apply(Command::Brake, &mut sink);
        pedals.apply(Command::Neutral, &mut sink);

        assert_eq!(
            sink.actions(),
            vec![
                SinkAction::Press(PedalKey::Accelerate),
                SinkAction::Release(PedalKey::Accelerate),
                SinkAction::Press(PedalKey::Brake),
                SinkAction::Release(PedalKey::Brake),
            ]
        );
        assert!(sink.pressed_now().is_empty());
    }

    #[test]
    fn never_both_keys_pressed_at_once() {
        let mut sink = RecordingSink::new();
        let mut pedals = Pedals::new();
        let sequence = [
            Command::Accelerate,
            Command::Accelerate,
            Command::Brake,
            Command::Accelerate,
            Command::Neutral,
            Command::Brake,
            Command::Unrecognized(0),
            Command::Neutral,
        ];
        for command in sequence {
            pedals.apply(command, &mut sink);
            assert!(sink.pressed_now().len() <= 1, "after {:?}", command);
        }
    }

    #[test]
    fn repeated_command_is_a_no_op() {
        let mut sink = RecordingSink::new();
        let mut pedals = Pedals::new();
        pedals.apply(Command::Accelerate, &mut sink);
        let actions = sink.actions().len();
        pedals.apply(Command::Accelerate, &mut sink);
        assert_eq!(sink.actions().len(), actions);
    }

    #[test]
    fn reset_releases_both_keys_and_returns_to_idle() {
        let mut sink = RecordingSink::new();
        let mut pedals = Pedals::new();
        pedals.apply(Command::Brake, &mut sink);
        pedals.reset(&mut sink);
        assert_eq!(pedals.state(), PedalState::Idle);
        assert!(sink.pressed_now().is_empty());
    }
}
