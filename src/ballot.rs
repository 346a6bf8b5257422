//! Anonymous questionnaire ballots.
//!
//! Every answer is turned into a one-hot slot vector, batch encoded and encrypted under the
//! questionnaire's public key. The backend adds the ciphertexts of all submissions slot-wise, so
//! after decryption slot `k` of question `i` counts the votes for option `k`.

use std::sync::Arc;

use futures_util::future::join_all;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;

use crate::bfv::{
    encoder::BatchEncoder, params::Parameters, BfvEncryptor, BfvError, Ciphertext, PublicKey,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum BallotError {
    #[display(fmt = "{}", _0)]
    Crypto(BfvError),
    #[display(fmt = "expected {} answers, got {}", expected, actual)]
    #[from(ignore)]
    AnswerCountMismatch { expected: usize, actual: usize },
    #[display(fmt = "option {} is out of range for {} choices", option, choices)]
    #[from(ignore)]
    AnswerOutOfRange { option: usize, choices: usize },
    #[display(fmt = "encryption task failed: {}", _0)]
    TaskFailed(JoinError),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
}

/// The questionnaire as handed out by the backend. Fields this client has no use for are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Questionnaire {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub deadline: Option<String>,
    pub questions: Vec<Question>,
    pub public_key: PublicKey,
    pub params: Parameters,
}

impl Questionnaire {
    /// The identifier submissions are filed under: the share link, or the numeric id if there is
    /// no link.
    pub fn submission_id(&self) -> Option<String> {
        self.link
            .clone()
            .or_else(|| self.id.map(|id| id.to_string()))
    }
}

/// The envelope posted back to the backend.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub questionnaire_id: String,
    pub encrypted_answers: Vec<Ciphertext>,
}

/// The slot vector with a single `1` at `option`.
pub fn one_hot(option: usize, ring_degree: usize) -> Result<Vec<u64>, BallotError> {
    if option >= ring_degree {
        return Err(BallotError::AnswerOutOfRange {
            option,
            choices: ring_degree,
        });
    }
    let mut slots = vec![0; ring_degree];
    slots[option] = 1;
    Ok(slots)
}

/// Encrypts the answers to one questionnaire.
#[derive(Clone, Debug)]
pub struct Ballot {
    questions: Arc<Vec<Question>>,
    encoder: Arc<BatchEncoder>,
    encryptor: Arc<BfvEncryptor>,
}

impl Ballot {
    pub fn new(questionnaire: &Questionnaire) -> Result<Self, BallotError> {
        let params = questionnaire.params;
        let encoder = BatchEncoder::new(&params)?;
        let encryptor = BfvEncryptor::new(&params, questionnaire.public_key.clone())?;
        debug!(
            "Prepared ballot for {} questions with d = {}, t = {}, q = {}",
            questionnaire.questions.len(),
            params.poly_degree(),
            params.plain_modulus(),
            params.coeff_modulus()
        );
        Ok(Self {
            questions: Arc::new(questionnaire.questions.clone()),
            encoder: Arc::new(encoder),
            encryptor: Arc::new(encryptor),
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Encrypts the choice of `option` for question `question`.
    pub fn encrypt_answer(&self, question: usize, option: usize) -> Result<Ciphertext, BallotError> {
        let choices = self.choices(question)?;
        if option >= choices {
            return Err(BallotError::AnswerOutOfRange { option, choices });
        }
        let slots = one_hot(option, self.encoder.slot_count())?;
        let plaintext = self.encoder.encode(&slots)?;
        Ok(self.encryptor.encrypt(&plaintext)?)
    }

    /// Encrypts one answer per question on the blocking thread pool. The ciphertexts are returned
    /// in question order.
    pub async fn encrypt_answers(&self, answers: &[usize]) -> Result<Vec<Ciphertext>, BallotError> {
        if answers.len() != self.questions.len() {
            return Err(BallotError::AnswerCountMismatch {
                expected: self.questions.len(),
                actual: answers.len(),
            });
        }

        let tasks = answers.iter().copied().enumerate().map(|(question, option)| {
            let ballot = self.clone();
            tokio::task::spawn_blocking(move || ballot.encrypt_answer(question, option))
        });
        let ciphertexts = join_all(tasks)
            .await
            .into_iter()
            .map(|result| result?)
            .collect::<Result<Vec<_>, _>>()?;

        info!("Encrypted {} answers", ciphertexts.len());
        Ok(ciphertexts)
    }

    pub async fn submit(
        &self,
        questionnaire_id: String,
        answers: &[usize],
    ) -> Result<Submission, BallotError> {
        Ok(Submission {
            questionnaire_id,
            encrypted_answers: self.encrypt_answers(answers).await?,
        })
    }

    fn choices(&self, question: usize) -> Result<usize, BallotError> {
        let question = self.questions.get(question).ok_or(BallotError::AnswerCountMismatch {
            expected: self.questions.len(),
            actual: question + 1,
        })?;
        // A question cannot have more options than the plaintext has slots.
        Ok(question.options.len().min(self.encoder.slot_count()))
    }
}
