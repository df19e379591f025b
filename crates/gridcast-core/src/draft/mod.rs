// Live-draft bookkeeping: recorded picks and the drafted-player set.

pub mod pick;
pub mod state;
