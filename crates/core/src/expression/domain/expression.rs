/// The closed set of expressions the classifier can report.
///
/// Declaration order doubles as the tie-break for equal scores: when two
/// expressions score identically, the earlier variant wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Expression {
    pub const ALL: [Expression; 7] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Surprised,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Surprised => "surprised",
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One confidence per expression, produced by a classifier for a single
/// face. Immutable once built; consumed by [`ExpressionScores::dominant`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionScores {
    scores: [f32; 7],
}

impl ExpressionScores {
    /// Builds from scores ordered as [`Expression::ALL`].
    pub fn new(scores: [f32; 7]) -> Self {
        Self { scores }
    }

    pub fn get(&self, expression: Expression) -> f32 {
        self.scores[expression as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Expression, f32)> + '_ {
        Expression::ALL.iter().map(|&e| (e, self.get(e)))
    }

    /// The expression with the strictly greatest score.
    ///
    /// Ties resolve to the earliest variant in declaration order, so the
    /// result is deterministic regardless of how the scores were produced.
    pub fn dominant(&self) -> Expression {
        let mut best = Expression::ALL[0];
        for &e in &Expression::ALL[1..] {
            if self.get(e) > self.get(best) {
                best = e;
            }
        }
        best
    }
}

/// The value published by each poll tick: a dominant expression, or the
/// sentinel when the frame contained no face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mood {
    Detected(Expression),
    NoFace,
}
