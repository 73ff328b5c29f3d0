//! Execution seam: where instructions leave the engine.

use crate::domain::TradingInstruction;

/// Receives every instruction the engine emits, in order.
///
/// Implementations are the order/execution collaborator: a backtester that
/// simulates fills, a live router, or a plain recorder.
pub trait ExecutionSink {
    fn submit(&mut self, instruction: &TradingInstruction);
}

/// Records instructions.
impl ExecutionSink for Vec<TradingInstruction> {
    fn submit(&mut self, instruction: &TradingInstruction) {
        self.push(*instruction);
    }
}

impl<S: ExecutionSink + ?Sized> ExecutionSink for &mut S {
    fn submit(&mut self, instruction: &TradingInstruction) {
        (**self).submit(instruction);
    }
}

/// Discards everything. Useful when only the final position matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ExecutionSink for NullSink {
    fn submit(&mut self, _instruction: &TradingInstruction) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(mut sink: impl ExecutionSink) {
        sink.submit(&TradingInstruction::CancelAll);
        sink.submit(&TradingInstruction::Buy {
            price: 1.0,
            volume: 2,
        });
    }

    #[test]
    fn vec_records_in_order() {
        let mut recorded: Vec<TradingInstruction> = Vec::new();
        feed(&mut recorded);
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0], TradingInstruction::CancelAll);
        assert_eq!(recorded[1].volume(), Some(2));
    }

    #[test]
    fn null_sink_accepts_anything() {
        feed(NullSink);
    }
}
