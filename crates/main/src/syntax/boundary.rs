////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use lady_deirdre::lexis::SiteSpan;

use crate::syntax::CompletionInfo;

/// Decides which part of the text an accepted completion replaces, and
/// which part of the token the candidates are matched against.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompletionBoundary {
    /// Replace the token text up to the caret and keep the rest of the
    /// token. Candidates are matched against the text up to the caret.
    #[default]
    ReplaceUntilCaret,

    /// Replace the whole token text. Candidates are matched against the
    /// text up to the caret.
    ReplaceWholeTokenMatchUntilCaret,

    /// Replace the whole token text. Candidates are matched against the
    /// whole token text.
    ReplaceWholeTokenMatchWholeToken,
}

impl CompletionBoundary {
    /// The text range an accepted completion replaces.
    pub fn range(self, info: &CompletionInfo) -> SiteSpan {
        match self {
            Self::ReplaceUntilCaret => info.text_start..info.caret,
            Self::ReplaceWholeTokenMatchUntilCaret | Self::ReplaceWholeTokenMatchWholeToken => {
                info.text_start..info.text_end
            }
        }
    }

    /// The text the candidates are matched against.
    pub fn pattern(self, info: &CompletionInfo) -> &str {
        match self {
            Self::ReplaceUntilCaret | Self::ReplaceWholeTokenMatchUntilCaret => {
                &info.text_to_caret
            }
            Self::ReplaceWholeTokenMatchWholeToken => &info.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::{CompletionBoundary, TokenError, TokenStream};

    #[test]
    fn test_boundary_modes() {
        let mut stream = TokenStream::new("a.getValue", Some(5));

        stream.set_position(2);

        let Err(TokenError::Completion(info)) = stream.read_identifier() else {
            panic!("Completion expected.");
        };

        assert_eq!(CompletionBoundary::ReplaceUntilCaret.range(&info), 2..5);
        assert_eq!(CompletionBoundary::ReplaceUntilCaret.pattern(&info), "get");

        assert_eq!(
            CompletionBoundary::ReplaceWholeTokenMatchUntilCaret.range(&info),
            2..10,
        );
        assert_eq!(
            CompletionBoundary::ReplaceWholeTokenMatchUntilCaret.pattern(&info),
            "get",
        );

        assert_eq!(
            CompletionBoundary::ReplaceWholeTokenMatchWholeToken.range(&info),
            2..10,
        );
        assert_eq!(
            CompletionBoundary::ReplaceWholeTokenMatchWholeToken.pattern(&info),
            "getValue",
        );
    }

    #[test]
    fn test_caret_in_whitespace() {
        let mut stream = TokenStream::new("a.  x", Some(3));

        stream.set_position(2);

        let Err(TokenError::Completion(info)) = stream.read_identifier() else {
            panic!("Completion expected.");
        };

        for boundary in [
            CompletionBoundary::ReplaceUntilCaret,
            CompletionBoundary::ReplaceWholeTokenMatchUntilCaret,
            CompletionBoundary::ReplaceWholeTokenMatchWholeToken,
        ] {
            assert_eq!(boundary.range(&info), 3..3);
            assert_eq!(boundary.pattern(&info), "");
        }
    }
}
